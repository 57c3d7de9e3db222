use anyhow::Result;
use minishell::ExitCode;
use minishell::builtin::Registry;
use minishell::input::Editor;
use minishell::repl::Session;

fn main() {
    env_logger::init();
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("minishell: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run() -> Result<ExitCode> {
    let registry = Registry::default();
    let builtins = registry.names().iter().map(|s| s.to_string()).collect();
    let editor = Editor::new(builtins)?;
    Session::with_registry(editor, registry).run()
}
