/*
[INPUT]:  Cluster endpoints and account addresses
[OUTPUT]: On-chain balances and token accounts
[POS]:    RPC layer - blockchain endpoint communication
[UPDATE]: When adding RPC methods
*/

pub mod client;
pub mod types;

pub use client::RpcClient;
pub use types::{
    Commitment, LAMPORTS_PER_SOL, ParsedTokenAccount, TokenAccountInfo, TokenAmount,
    lamports_to_sol,
};
