use shared::Language;

/// Opening line of the Agri-Bot transcript.
pub fn initial_bot_message(language: Language) -> &'static str {
    match language {
        Language::English => {
            "Hello! I am Agri-Bot. How can I help you with your farming questions today?"
        }
        Language::Hindi => {
            "नमस्ते! मैं एग्री-बॉट हूँ। आज मैं खेती से जुड़े आपके सवालों में कैसे मदद कर सकता हूँ?"
        }
        Language::Telugu => {
            "నమస్కారం! నేను అగ్రి-బాట్. ఈ రోజు మీ వ్యవసాయ ప్రశ్నలకు నేను ఎలా సహాయపడగలను?"
        }
    }
}

/// Shown in the transcript when a question could not be answered.
pub fn bot_error(language: Language) -> &'static str {
    match language {
        Language::English => {
            "Sorry, I'm having trouble connecting right now. Please try again later."
        }
        Language::Hindi => {
            "क्षमा करें, अभी कनेक्ट करने में समस्या हो रही है। कृपया बाद में पुनः प्रयास करें।"
        }
        Language::Telugu => {
            "క్షమించండి, ప్రస్తుతం కనెక్ట్ చేయడంలో సమస్య ఉంది. దయచేసి తర్వాత మళ్లీ ప్రయత్నించండి."
        }
    }
}
