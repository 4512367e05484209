pub const CAPTION_SYSTEM: &str = include_str!("../data/prompts/caption_system.txt");
pub const CAPTION_USER: &str = include_str!("../data/prompts/caption_user.txt");
pub const IMAGE_PROMPT_SYSTEM: &str = include_str!("../data/prompts/image_prompt_system.txt");
pub const IMAGE_PROMPT_USER: &str = include_str!("../data/prompts/image_prompt_user.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
