//! ECS Relationships モジュール
//!
//! エンティティ間の関係を Bevy 0.17 の Relationship 機能で管理します。

use bevy::prelude::*;

// ============================================================
// タスクマーカー ⇔ 表示先（客・テーブル・スタッフ）
// ============================================================

/// マーカーがどのエンティティの上に出ているかを示す Relationship
/// マーカー側に付与される（マーカー → 表示先への参照）
///
/// # 使用例
/// ```ignore
/// commands.spawn((TaskMarker { .. }, MarkerOf(guest_entity)));
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[relationship(relationship_target = TaskMarkers)]
pub struct MarkerOf(pub Entity);

impl Default for MarkerOf {
    fn default() -> Self {
        Self(Entity::PLACEHOLDER)
    }
}

/// 表示先に付いているマーカーの一覧
/// 表示先が消えるとマーカーも一緒に消える
#[derive(Component, Reflect, Debug, Default)]
#[reflect(Component)]
#[relationship_target(relationship = MarkerOf, linked_spawn)]
pub struct TaskMarkers(Vec<Entity>);

impl TaskMarkers {
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
