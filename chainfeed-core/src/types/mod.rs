mod pubkey;
pub use pubkey::{
    is_token_program, Pubkey, PubkeyError, TOKEN_2022_PROGRAM, TOKEN_2022_PROGRAM_ID,
    TOKEN_PROGRAM, TOKEN_PROGRAM_ID,
};

mod ticker;
pub use ticker::ProviderTicker;

mod price;
pub use price::{
    ErrorCode, ErrorWithCode, PriceResponse, PriceResult, ResolvedPrices, UnresolvedPrices,
    UnresolvedResult,
};

mod token;
pub use token::{AccountState, DecodeError, TokenAccount};

mod pair;
pub use pair::{CurrencyPair, CurrencyPairError};
