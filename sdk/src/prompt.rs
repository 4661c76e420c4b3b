use serde_json::Value;

/// Builds the prompt asking a mech to pick `count` validators out of
/// `validators`, answered as a role -> validator mapping.
pub fn nomination_prompt(validators: &Value, count: usize) -> Result<String, serde_json::Error> {
    let total = validators.as_array().map_or(0, Vec::len);
    let listing = serde_json::to_string_pretty(validators)?;
    Ok(format!(
        "You are given a list of {total} validator nodes in JSON format. \
         Select {count} validators that are geographically diverse and have high uptime and stake.\n\n\
         Return only a valid Python dictionary mapping validator_1 to validator_{count} \
         to the selected validators' addresses.\n\n\
         Here is the list:\n{listing}\n"
    ))
}
