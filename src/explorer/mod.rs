// 导航模块
//
// 展开集合、请求序号、侧边栏树存储，以及导航状态机和驱动它的控制器

mod controller;
mod expansion;
mod sequence;
mod state;
mod tree;

pub use controller::{execute, NavigationController};
pub use expansion::ExpansionSet;
pub use sequence::{ActionClass, SequenceTracker};
pub use state::{
    reduce, Action, CrumbTarget, CurrentFolder, Effect, NavError, NavigationState, Phase,
    SEARCH_CRUMB_ID, SEARCH_CRUMB_NAME,
};
pub use tree::{ArenaEntry, TreeArena};
