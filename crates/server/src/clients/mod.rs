pub mod chess_com;
pub mod llm;
