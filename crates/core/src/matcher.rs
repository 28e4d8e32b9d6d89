use crate::profile::Profile;

/// True when the lowercased guess appears as a substring of any of the
/// subject's name fields. The guess is taken as typed, minus casing; no
/// edge-trimming happens here.
pub fn guess_matches(guess: &str, subject: &Profile) -> bool {
    let guess = guess.to_lowercase();
    [
        subject.first_name.as_str(),
        subject.last_name.as_str(),
        subject.display_name.as_str(),
        subject.real_name.as_str(),
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(&guess))
}
