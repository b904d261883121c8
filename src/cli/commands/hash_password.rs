use crate::cli::parser::Commands;
use crate::core::auth::AuthLogic;
use crate::errors::AppResult;

/// Handle the `hash-password` command: print the digest alone on stdout.
pub fn handle(cmd: &Commands) -> AppResult<()> {
    if let Commands::HashPassword { password } = cmd {
        println!("{}", AuthLogic::hash_password(password));
    }
    Ok(())
}
