//! Functions that emit data for the wrapping shell function.

const VISIT_PREFIX: &str = "__TG_VISIT__=";

/// Machine-readable exit payload for a followed "Visit website" link.
pub fn visit_payload(url: &str) -> String {
    format!("{VISIT_PREFIX}{url}")
}

/// Emit the exit payload on stdout.
pub fn print_visited_url(url: &str) {
    println!("{}", visit_payload(url));
}

/// Returns the bash function that users should add to their `.bashrc`.
///
/// The function name is `tg` and it invokes the binary by its package name
/// (read from `Cargo.toml` at compile time).
pub fn bash_function() -> String {
    wrapper("[ $exit_code -eq 0 ] && [ -n \"$url\" ]")
}

/// Returns the zsh function that users should add to their `.zshrc`.
pub fn zsh_function() -> String {
    wrapper("[[ $exit_code -eq 0 ]] && [[ -n \"$url\" ]]")
}

fn wrapper(visit_test: &str) -> String {
    let bin = env!("CARGO_PKG_NAME");
    format!(
        r#"
# ── {bin}: thumbnail grid with inline previews ─────────────
# Run `tg <dir-or-manifest>...`.  A followed "Visit website" link is
# opened with the desktop's URL handler after the TUI exits.
tg() {{
    local output
    output="$(command {bin} "$@")"
    local exit_code=$?
    local url=""
    while IFS= read -r line; do
        case "$line" in
            {VISIT_PREFIX}*) url="${{line#{VISIT_PREFIX}}}" ;;
        esac
    done <<< "$output"
    if {visit_test}; then
        if command -v xdg-open >/dev/null 2>&1; then
            xdg-open "$url" >/dev/null 2>&1 &
        elif command -v open >/dev/null 2>&1; then
            open "$url"
        else
            printf '%s\n' "$url"
        fi
    fi
    return $exit_code
}}
"#
    )
}
