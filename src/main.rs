fn main() -> anyhow::Result<()> {
    let command_line_interface = shapeshift::cli::CommandLineInterface::load();
    command_line_interface.run()
}
