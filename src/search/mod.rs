pub mod highlight;
pub mod local;
pub mod merge;
pub mod normalize;
