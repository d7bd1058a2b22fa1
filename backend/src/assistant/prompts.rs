use shared::{Language, display_disease_name};

pub fn treatment_prompt(label: &str, language: Language) -> String {
    let disease = display_disease_name(label);
    let language = language.name();
    format!(
        "The plant disease is '{disease}'. \
         What is the common name for this disease in the {language} language? \
         Also, what are some simple, effective organic treatments or fertilizers a farmer in India can use to cure this? \
         Provide the entire response in the {language} language, starting with the disease name."
    )
}

pub fn farmer_question_prompt(question: &str, language: Language) -> String {
    let language = language.name();
    format!(
        "You are Agri-Bot, a helpful AI assistant for farmers in India. \
         Answer the following question concisely and in simple terms. \
         Provide the entire response in the {language} language. \
         Question: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_prompt_names_disease_and_language() {
        let prompt = treatment_prompt("Tomato___Late_blight", Language::Hindi);
        assert!(prompt.starts_with("The plant disease is 'Tomato Late blight'. "));
        assert!(prompt.contains("in the Hindi language?"));
        assert!(prompt.ends_with("Provide the entire response in the Hindi language, starting with the disease name."));
    }

    #[test]
    fn unknown_language_code_builds_the_english_prompt() {
        assert_eq!(
            treatment_prompt("Potato___Early_blight", Language::from_code("fr")),
            treatment_prompt("Potato___Early_blight", Language::from_code("en"))
        );
    }

    #[test]
    fn question_prompt_ends_with_the_question() {
        let prompt = farmer_question_prompt("How much urea for paddy?", Language::Telugu);
        assert!(prompt.starts_with("You are Agri-Bot, a helpful AI assistant for farmers in India. "));
        assert!(prompt.contains("in the Telugu language. "));
        assert!(prompt.ends_with("Question: How much urea for paddy?"));
    }
}
