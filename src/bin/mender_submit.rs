fn main() {
    mender_tools::app::cli::run_submit();
}
