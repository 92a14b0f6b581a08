fn main() -> std::process::ExitCode {
    codebundle::cli::main()
}
