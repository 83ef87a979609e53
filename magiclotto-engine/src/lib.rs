pub mod frequency;
pub mod recommend;
pub mod scoring;
