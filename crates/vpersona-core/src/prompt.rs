//! Prompt builders for the generation pipeline.
//!
//! Pure string formatting; the JSON shapes named in the prompts match the
//! schemas in [`crate::schema`].

/// Asks for `count` full names of people related to the project.
pub fn build_names_prompt(project_name: &str, count: usize) -> String {
    format!(
        "Generate {count} realistic full names (first name and last name) of people \
who could be related to the project \"{project_name}\": team members, partners or \
customers. Every person is aged 30-40 years old. Do not repeat a name.

Respond with JSON only, in the form:
{{\"persons\": [{{\"name\": \"<full name>\"}}]}}"
    )
}

/// Asks for a biography and a short status line for one person.
pub fn build_biography_prompt(project_name: &str, person_name: &str) -> String {
    format!(
        "Write a short biography (3-5 sentences) for {person_name}, a person aged 30-40 \
years old who is related to the project \"{project_name}\". Also give a status: a short \
job title or role, at most 6 words.

Respond with JSON only, in the form:
{{\"biography\": \"<biography>\", \"status\": \"<status>\"}}"
    )
}

/// Builds the image query for a person's headshot.
pub fn build_headshot_prompt(person_name: &str) -> String {
    format!("Photo headshot for the {person_name}, Aged 30-40 years old.")
}
