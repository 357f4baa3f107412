#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address as EthAddress, B256, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use bigdecimal::{BigDecimal, Zero};
use reward_core::{Address, EventKind};
use snafu::{ensure, ResultExt};

use crate::error::{DecimalSnafu, EthAddressSnafu, NegativeAmountSnafu, Result, TokenUnitsSnafu};

sol!(
    /// The TEA token: an ERC-20 with staking and reward events.
    #[sol(rpc)]
    interface TeaToken {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Stake(address indexed user, uint256 amount);
        event Unstake(address indexed user, uint256 amount);
        event RewardDistributed(address indexed to, uint256 amount);

        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }

    /// Stake registry recording how many TEA tokens back each project.
    #[sol(rpc)]
    interface TeaStaking {
        function getProjectStake(address project) external view returns (uint256);
    }
);

/// Topic-0 hash of the token event of `kind`.
pub fn event_signature(kind: EventKind) -> B256 {
    match kind {
        EventKind::Transfer => TeaToken::Transfer::SIGNATURE_HASH,
        EventKind::Stake => TeaToken::Stake::SIGNATURE_HASH,
        EventKind::Unstake => TeaToken::Unstake::SIGNATURE_HASH,
        EventKind::RewardDistributed => TeaToken::RewardDistributed::SIGNATURE_HASH,
    }
}

/// Scales a raw 18-decimal token value down to token units.
pub fn wei_to_tokens(value: U256) -> Result<BigDecimal> {
    let formatted = format_ether(value);
    let tokens: BigDecimal = formatted
        .parse()
        .context(DecimalSnafu { amount: formatted })?;
    Ok(tokens.normalized())
}

/// Scales token units up to the raw 18-decimal value the contract expects.
///
/// Digits beyond the 18th decimal are truncated.
pub fn tokens_to_wei(amount: &BigDecimal) -> Result<U256> {
    let plain = amount.to_plain_string();
    ensure!(*amount >= BigDecimal::zero(), NegativeAmountSnafu { amount: plain });
    parse_ether(&plain).context(TokenUnitsSnafu { amount: plain })
}

/// Parses an engine address into a 20-byte Ethereum address.
pub fn to_eth_address(address: &Address) -> Result<EthAddress> {
    address
        .as_str()
        .trim()
        .parse()
        .context(EthAddressSnafu {
            address: address.as_str(),
        })
}
