fn main() -> std::process::ExitCode {
    pixclad_uploader_lib::run()
}
