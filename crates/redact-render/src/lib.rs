pub mod composite;
pub mod hit;

pub use composite::{
    CompositeOptions, RenderError, SourceImage, export_file_name, export_png, paint_redactions,
    render,
};
pub use hit::hit_test;
