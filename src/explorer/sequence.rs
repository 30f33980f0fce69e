//! 请求序号
//!
//! 每个导航动作发出时分配严格递增的序号，响应到达时只有序号等于
//! 该动作类别最近一次发出的序号才允许提交，过期响应直接丢弃。

/// 动作类别
///
/// 文件夹内容、面包屑和搜索共用 Content 类别，
/// 过期的搜索结果不能覆盖之后选中的文件夹，反之亦然
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Tree,
    Content,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last_issued: u64,
    latest_tree: Option<u64>,
    latest_content: Option<u64>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某个类别分配新的序号
    pub fn issue(&mut self, class: ActionClass) -> u64 {
        self.last_issued += 1;
        let seq = self.last_issued;
        *self.slot_mut(class) = Some(seq);
        seq
    }

    /// 该类别最近发出的序号
    pub fn latest(&self, class: ActionClass) -> Option<u64> {
        match class {
            ActionClass::Tree => self.latest_tree,
            ActionClass::Content => self.latest_content,
        }
    }

    /// 响应是否仍然有效
    pub fn is_current(&self, class: ActionClass, seq: u64) -> bool {
        self.latest(class) == Some(seq)
    }

    fn slot_mut(&mut self, class: ActionClass) -> &mut Option<u64> {
        match class {
            ActionClass::Tree => &mut self.latest_tree,
            ActionClass::Content => &mut self.latest_content,
        }
    }
}
