//! Reads the TEA stake backing a project from the staking contract.

use alloy::primitives::Address as EthAddress;
use alloy::providers::Provider;
use bigdecimal::BigDecimal;
use log::debug;
use snafu::ResultExt;

use crate::error::{ContractSnafu, Result};
use crate::token::{wei_to_tokens, TeaStaking};

/// Looks up one project's stake.
pub struct ProjectStakeReader<P> {
    /// RPC provider.
    provider: P,
    /// Staking contract address.
    staking: EthAddress,
    /// Project whose stake is read.
    project: EthAddress,
}

impl<P: Provider + Clone> ProjectStakeReader<P> {
    /// Creates a reader for `project` on the staking contract at `staking`.
    pub fn new(provider: P, staking: EthAddress, project: EthAddress) -> Self {
        Self {
            provider,
            staking,
            project,
        }
    }

    /// The project being looked up.
    pub fn project(&self) -> EthAddress {
        self.project
    }

    /// Tokens currently staked on the project, in token units.
    pub async fn project_stake(&self) -> Result<BigDecimal> {
        let contract = TeaStaking::new(self.staking, self.provider.clone());
        debug!("Reading stake of project {} from {}", self.project, self.staking);

        let stake = contract
            .getProjectStake(self.project)
            .call()
            .await
            .context(ContractSnafu)?
            ._0;
        wei_to_tokens(stake)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, keccak256};
    use alloy::providers::ProviderBuilder;
    use alloy::sol_types::SolCall;

    use super::*;
    use crate::error::NodeError;

    const STAKING: EthAddress = address!("00000000000000000000000000000000000000cc");
    const PROJECT: EthAddress = address!("00000000000000000000000000000000000000dd");

    #[test]
    fn we_can_encode_a_project_stake_call() {
        let call = TeaStaking::getProjectStakeCall { project: PROJECT };

        assert_eq!(TeaStaking::getProjectStakeCall::SIGNATURE, "getProjectStake(address)");
        assert_eq!(
            TeaStaking::getProjectStakeCall::SELECTOR.to_vec(),
            keccak256("getProjectStake(address)")[..4].to_vec()
        );

        let encoded = call.abi_encode();
        assert_eq!(encoded.len(), 4 + 32);
        assert_eq!(&encoded[16..36], PROJECT.as_slice());
    }

    #[tokio::test]
    async fn we_cannot_read_a_stake_without_a_reachable_node() {
        let provider = ProviderBuilder::new().on_http("http://127.0.0.1:1".parse().unwrap());
        let reader = ProjectStakeReader::new(provider, STAKING, PROJECT);

        assert_eq!(reader.project(), PROJECT);
        assert!(matches!(
            reader.project_stake().await,
            Err(NodeError::Contract { .. })
        ));
    }
}
