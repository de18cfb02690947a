// SPDX-License-Identifier: MIT
//! The fixed review instruction prompt.

/// Build the per-chunk review prompt with the diff chunk embedded.
///
/// The backend must answer with the exact token `PASS` on a clean chunk;
/// anything else is treated as findings.
pub fn build_review_prompt(chunk: &str) -> String {
    format!(
        "Role: Professional code reviewer.\n\
         Task: Analyze this git diff for issues: code smells, anti patterns, dead code, bad naming, unsafe constructs, leaked passwords.\n\
         Rules:\n\
         1. If no issues found, output EXACTLY one word: PASS\n\
         2. No conversational filler, no introductions.\n\
         3. Group issues by Class name.\n\
         \n\
         STRICT RESPONSE FORMAT EXAMPLE:\n\
         UserService.java:\n\
         - Hardcoded password on line 12\n\
         - Empty catch block in login method\n\
         \n\
         DatabaseConfig.java:\n\
         - Raw SQL usage poses injection risk\n\
         \n\
         CODE DIFF TO ANALYZE:\n\
         {chunk}"
    )
}
