//! Console reporting of submission results.

use crate::ledger::types::SubmitResult;

const RULE: &str = "--------------------------------";
const BANNER: &str = "========================================";

/// Result lines for one submission: engine result, then hash and explorer
/// URL when the node returned a hash.
pub fn format_submission(label: &str, result: &SubmitResult, explorer_url: &str) -> Vec<String> {
    let mut lines = vec![format!("{} - Engine Result: {}", label, result.engine_result)];
    if let Some(hash) = &result.hash {
        lines.push(format!("{} - Transaction Hash: {}", label, hash));
        lines.push(format!("{} - Explorer URL: {}", label, explorer_link(explorer_url, &hash.to_string())));
    }
    lines
}

/// `<base><hash>`, inserting a `/` only if the base lacks one.
pub fn explorer_link(base: &str, hash: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, hash)
    } else {
        format!("{}/{}", base, hash)
    }
}

pub fn print_submission(label: &str, result: &SubmitResult, explorer_url: &str) {
    println!("{}", RULE);
    for line in format_submission(label, result, explorer_url) {
        println!("{}", line);
    }
    println!("{}", RULE);
}

pub fn print_banner(title: &str) {
    println!("{}", BANNER);
    println!("{}", title);
    println!("{}", BANNER);
}

pub fn print_stage(step: u8, title: &str) {
    println!();
    println!("--- Step {}: {} ---", step, title);
}
