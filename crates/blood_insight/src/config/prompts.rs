//! Fixed analysis prompt

/// Literal reply requested for images that are not blood test results
pub const NO_RESULT_SENTINEL: &str = "No blood test result found.";

/// Build the analysis prompt, inserting the user's description as
/// additional context when it is not blank.
pub fn build_prompt(description: &str) -> String {
    let mut prompt = String::from("Analyze this blood test result image.");
    if !description.trim().is_empty() {
        prompt.push_str(" Additional context: ");
        prompt.push_str(description);
    }
    prompt.push_str(
        "\nProvide a brief analysis:\n\
         1. Are the results healthy or not?\n\
         2. If not healthy, what potential conditions are indicated?\n\
         3. What immediate actions should be taken?\n\
         Keep the response concise and focused on key concerns only.\n",
    );
    prompt.push_str(&format!(
        "If the image did not contain a blood test result, respond with \"{}\"",
        NO_RESULT_SENTINEL
    ));
    prompt
}

/// True when the provider answered with the no-result sentinel
pub fn is_no_result(text: &str) -> bool {
    text.trim().trim_matches('"').trim() == NO_RESULT_SENTINEL
}
