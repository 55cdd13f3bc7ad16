// Caption generation prompt templates.
// All prompts for the generation module are defined here.

pub const CAPTION_SYSTEM: &str = "\
You are a social media content expert specializing in Instagram. \
You MUST respond with valid JSON only. No markdown fences, no explanations. \
Always answer in the same language as the user's prompt.";

pub const POST_CONTEXT: &str = "an Instagram post with a longer, engaging caption";
pub const STORY_CONTEXT: &str = "an Instagram story with a short, catchy caption";

pub const VERSION_A_NOTE: &str = "Version A - Creative approach";
pub const VERSION_B_NOTE: &str = "Version B - Different angle";

pub const CAPTION_PROMPT_TEMPLATE: &str = r#"Create {content_type} based on this prompt: {prompt}

IMPORTANT: Respond in the same language as the user's prompt. If the prompt is in Portuguese, respond in Portuguese. If it's in English, respond in English, etc.

Generate the content in the following JSON format:
{
  "caption": "the caption text here",
  "hashtags": ["hashtag1", "hashtag2", "hashtag3", "hashtag4", "hashtag5"]
}

Guidelines:
- For POSTS: Create engaging captions between 100-200 words with storytelling elements
- For STORIES: Create short, punchy captions under 50 words
- Include 5-10 relevant hashtags without the # symbol
- Make the content engaging, authentic, and suitable for Instagram
- Focus on creating value for the audience
- ALWAYS use the same language as the input prompt for both caption and hashtags

Return ONLY the JSON object, no additional text."#;
