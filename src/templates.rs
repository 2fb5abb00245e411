/// Embedded templates for xpr-fixer

/// git post-merge hook, CRLF line endings
pub const HOOK_POST_MERGE: &str =
    "#!/bin/sh\r\n# Git hook for {product} by {author}\r\nexec {command} update\r\n";

/// Render the post-merge hook for the given program
pub fn render_hook(product: &str, author: &str, command: &str) -> String {
    HOOK_POST_MERGE
        .replace("{product}", product)
        .replace("{author}", author)
        .replace("{command}", command)
}
