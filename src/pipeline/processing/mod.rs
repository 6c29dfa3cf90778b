// Pipeline processing: mapping raw rows onto the standard record

pub mod normalize;
