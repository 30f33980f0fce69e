// 目录模块
//
// 定义目录数据类型、只读客户端接口，以及 HTTP / 内存两种实现

mod client;
mod memory;
mod types;

pub use client::{CatalogClient, HttpCatalogClient};
pub use memory::MemoryCatalog;
pub use types::*;
