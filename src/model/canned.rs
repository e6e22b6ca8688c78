pub const DEFAULT_RESPONSE: &str = "That's an interesting question! As a demo running on your device I only know a handful of answers, but a full on-device model would generate a complete reply right here.";

const GREETING: &str = "Hello! I'm running entirely on your device using Gemini Nano. Your data never leaves your phone. How can I help you today?";

// First match wins, so specific topics sit above the short greeting terms.
const RESPONSES: &[(&[&str], &str)] = &[
    (
        &["devfest"],
        "Welcome to DevFest! This demo shows how Gemini Nano brings generative AI straight to Android devices without a round trip to the cloud.",
    ),
    (
        &["privacy", "private", "data"],
        "Privacy is the biggest win of on-device AI. Your prompts and my replies are processed locally and never sent to a server.",
    ),
    (
        &["offline", "internet", "network"],
        "I work completely offline. Because the model lives on your phone you can keep chatting even in airplane mode.",
    ),
    (
        &["fast", "speed", "latency"],
        "Running locally removes network latency, so replies start streaming almost instantly.",
    ),
    (
        &["gemini", "nano", "model"],
        "Gemini Nano is Google's most efficient model, built to run directly on mobile hardware through Android AICore.",
    ),
    (
        &["android", "aicore"],
        "Android AICore is a system service that manages on-device foundation models, handling updates and safety for every app that uses them.",
    ),
    (
        &["safety", "filter", "block"],
        "Every message is checked against configurable safety filters before I answer. You can adjust them in the settings dialog.",
    ),
    (
        &["weather"],
        "I can't check the live weather because I never go online, but a weather app could use me to summarize a forecast it already has.",
    ),
    (
        &["joke", "funny"],
        "Why did the neural network go to therapy? It had too many unresolved layers!",
    ),
    (
        &["help", "what can you do"],
        "I can talk about on-device AI, Gemini Nano, privacy and DevFest. Try asking me why running locally matters!",
    ),
    (
        &["thank"],
        "You're welcome! Let me know if there's anything else you'd like to know.",
    ),
    (&["hello", "hi", "hey"], GREETING),
];

/// Picks the canned reply for `prompt` by substring match on the
/// lower-cased text.
pub fn select_response(prompt: &str) -> &'static str {
    let lowercase = prompt.to_lowercase();
    RESPONSES
        .iter()
        .find(|(keywords, _)| {
            keywords
                .iter()
                .any(|keyword| lowercase.contains(keyword))
        })
        .map(|(_, response)| *response)
        .unwrap_or(DEFAULT_RESPONSE)
}
