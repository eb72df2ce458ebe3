//! 重複排除セット
//!
//! 一度読み取ったペイロードを記録し、クリアまたは個別削除されるまで
//! 「新規」として扱わない。挿入順は一覧表示と送信順に使う。

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct DedupSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, payload: &str) -> bool {
        self.seen.contains(payload)
    }

    /// 新規なら追加して true
    pub fn insert(&mut self, payload: &str) -> bool {
        if self.seen.contains(payload) {
            return false;
        }
        self.seen.insert(payload.to_string());
        self.order.push(payload.to_string());
        true
    }

    /// 存在すれば削除して true（存在しなくてもエラーにしない）
    pub fn remove(&mut self, payload: &str) -> bool {
        if !self.seen.remove(payload) {
            return false;
        }
        self.order.retain(|p| p != payload);
        true
    }

    /// 全削除し、削除件数を返す
    pub fn clear(&mut self) -> usize {
        let count = self.order.len();
        self.seen.clear();
        self.order.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 挿入順で列挙
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}
