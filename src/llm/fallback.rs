//! Offline keyword responder used when no remote backend is available
//!
//! Categories are checked in declaration order and the first one with a
//! matching keyword wins, so overlapping prompts resolve deterministically.

/// Number of prompt characters echoed back by the generic reply
const ECHO_CHARS: usize = 50;

/// (keywords, canned reply), in priority order
const CANNED_RESPONSES: &[(&[&str], &str)] = &[
    (
        &["hello", "hi"],
        "Hello! I'm Enes Aysu's personal assistant. How can I help you today?",
    ),
    (
        &["experience", "work"],
        "Enes is an AI Engineer at NeviTech, working on LLM platforms, OCR systems, and speaker recognition. He has experience in computer vision and industrial automation.",
    ),
    (
        &["education", "university"],
        "Enes graduated from Gebze Technical University with a Computer Engineering degree. He's planning to pursue an AI Master's program at FAU.",
    ),
    (
        &["skills", "programming"],
        "Enes is skilled in Python, AI/ML frameworks like PyTorch and TensorFlow, NLP tools, computer vision, and web development with FastAPI and React.",
    ),
    (
        &["projects"],
        "Enes has worked on manipulative social media detection, financial document Q&A systems, and various AI projects involving RAG and LLM integration.",
    ),
    (
        &["thank"],
        "You're welcome! Is there anything else you'd like to know about Enes?",
    ),
];

/// Produce the canned reply for a prompt
pub fn respond(prompt: &str) -> String {
    let prompt_lower = prompt.to_lowercase();

    CANNED_RESPONSES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| prompt_lower.contains(k)))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| demo_mode_reply(prompt))
}

fn demo_mode_reply(prompt: &str) -> String {
    // Count chars, not bytes: slicing at byte 50 could split a code point
    let preview: String = prompt.chars().take(ECHO_CHARS).collect();
    format!(
        "I understand you're asking about '{}...'. I'm currently in demo mode. Please set up Gemini API for full functionality by setting GEMINI_API_KEY environment variable.",
        preview
    )
}
