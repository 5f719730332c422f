fn main() -> std::io::Result<()> {
    storyqa_lib::run()
}
