use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    codeswitch_retrieval::cli::run_assemble(std::env::args().skip(1))
}
