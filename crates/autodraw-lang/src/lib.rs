pub mod syntax {
    pub mod token;
    pub mod lexer;
    pub mod parser;
}
pub mod types {
    pub mod mat;
    pub mod operation;
}
pub mod runtime {
    pub mod value;
    pub mod env;
    pub mod stack;
    pub mod engine;
}
pub mod instruction;
pub mod error;

pub use error::{CodecError, CompileError, Error, ErrorCode, InstructionError, Reason, RuntimeError, ValueError};
pub use instruction::{Command, Instruction};
pub use instruction::codec::{decode, encode};
pub use runtime::engine::{Engine, EngineConfig};
pub use runtime::value::Value;
pub use syntax::token::{Token, TokenKind};
pub use types::mat::Matrix;
pub use types::operation::{OpCode, Operation};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Split source text into operations, one per non-blank line. All line errors
/// are reported together.
pub fn parse(source: &str) -> Result<Vec<Operation>, Vec<Error>> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    syntax::parser::Parser::new(tokens).parse()
}

/// Parse and evaluate source text with the default configuration.
pub fn compile(source: &str) -> Result<Vec<Instruction>, CompileError> {
    compile_with(source, EngineConfig::default())
}

pub fn compile_with(source: &str, config: EngineConfig) -> Result<Vec<Instruction>, CompileError> {
    let ops = parse(source).map_err(CompileError::Syntax)?;
    evaluate(&ops, config).map_err(CompileError::Runtime)
}

/// Evaluate already-parsed operations to completion.
pub fn evaluate(ops: &[Operation], config: EngineConfig) -> Result<Vec<Instruction>, RuntimeError> {
    let mut engine = Engine::with_config(config);
    engine.run(ops)?;
    engine.finish()
}
