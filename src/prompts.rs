/// Prompt sent alongside the image when none is configured.
pub const DESCRIBE_IMAGE: &str = include_str!("../data/prompts/describe_image.txt");
