//! ledgerxml - Reports over ledger journals via their XML export.

fn main() -> std::process::ExitCode {
    ledgerxml::cmd::report::main()
}
