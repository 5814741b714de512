mod axis;

pub use axis::softmax_f32_axis;
