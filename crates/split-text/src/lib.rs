pub mod mapper;
pub mod normalize;
pub mod offsets;
pub mod pipeline;
pub mod stem;
pub mod tokenize;

pub use normalize::{normalize, AlignedText, Normalizer};
pub use pipeline::{process, SplitPipeline, SplitStats};
pub use stem::{create_stemmer, TokenStemmer};
pub use tokenize::{create_tokenizer, TextTokenizer, TokenizerKind};
