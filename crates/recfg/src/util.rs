/// Turn a display name into a safe resource name
///
/// `@` becomes the readable `_at_` first, then every remaining character
/// outside `[A-Za-z0-9-_]` becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.replace('@', "_at_")
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || character == '-' || character == '_' {
                character
            } else {
                '_'
            }
        })
        .collect()
}
