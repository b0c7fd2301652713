//! Prompt text for the AI collaborator.

use crate::config::CarConfig;

pub fn review_prompt(config: &CarConfig) -> String {
    let neon = if config.neon_underglow {
        config.neon_color.as_str()
    } else {
        "None"
    };

    format!(
        "Review this custom car design:\n\
         Brand: {brand}\n\
         Model: {model}\n\
         Body Type: {body}\n\
         Body Color: {paint}\n\
         Rims: {rims}\n\
         Spoiler: {spoiler}\n\
         Neon Underglow: {neon}\n\
         \n\
         Provide a critique of its aesthetic appeal and marketability.",
        brand = config.brand_name,
        model = config.model_name,
        body = config.body_type,
        paint = config.body_color,
        rims = config.rim_color,
        spoiler = if config.spoiler { "Yes" } else { "No" },
    )
}

pub fn render_prompt(config: &CarConfig) -> String {
    let mut prompt = format!(
        "A professional photorealistic 8k studio shot of a {body} car, \
         painted in high-gloss {paint}, with {rims} custom wheels.",
        body = config.body_type,
        paint = config.body_color,
        rims = config.rim_color,
    );
    if config.spoiler {
        prompt.push_str(" It has a racing rear wing.");
    }
    if config.neon_underglow {
        prompt.push_str(&format!(
            " Intense {} neon underglow lighting.",
            config.neon_color
        ));
    }
    prompt.push_str(&format!(
        " The brand is {} and the model is {}. \
         Cinematic lighting, dark luxury background, raytraced reflections.",
        config.brand_name, config.model_name
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyType;

    #[test]
    fn review_prompt_lists_design() {
        let prompt = review_prompt(&CarConfig::default());
        assert!(prompt.contains("Brand: APEX"));
        assert!(prompt.contains("Model: RS-1"));
        assert!(prompt.contains("Body Type: sport"));
        assert!(prompt.contains("Spoiler: Yes"));
        assert!(prompt.contains("Neon Underglow: None"));
    }

    #[test]
    fn review_prompt_names_neon_color_when_lit() {
        let config = CarConfig {
            neon_underglow: true,
            neon_color: "#7fff00".into(),
            ..Default::default()
        };
        assert!(review_prompt(&config).contains("Neon Underglow: #7fff00"));
    }

    #[test]
    fn render_prompt_mentions_optional_parts_only_when_fitted() {
        let bare = CarConfig {
            body_type: BodyType::Truck,
            spoiler: false,
            neon_underglow: false,
            ..Default::default()
        };
        let prompt = render_prompt(&bare);
        assert!(prompt.contains("of a truck car"));
        assert!(!prompt.contains("rear wing"));
        assert!(!prompt.contains("underglow"));

        let loud = CarConfig {
            spoiler: true,
            neon_underglow: true,
            ..bare
        };
        let prompt = render_prompt(&loud);
        assert!(prompt.contains("racing rear wing"));
        assert!(prompt.contains("#00ffff neon underglow"));
    }
}
