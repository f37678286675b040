mod class;
mod mapper;
mod tree;

pub use class::AccountClass;
pub use mapper::{AccountMapper, MappedAccount, Mapping, MappingSource};
pub use tree::{AccountTree, Node, NodeId};
