//! Pays rewards by sending ERC-20 `transfer` transactions from the operator wallet.

use alloy::network::Ethereum;
use alloy::primitives::Address as EthAddress;
use alloy::providers::Provider;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use log::info;
use reward_core::Address;
use reward_engine::error::BoxError;
use reward_engine::providers::DistributionProvider;
use snafu::{ensure, ResultExt};

use crate::error::{ContractSnafu, PendingTransactionSnafu, Result, RevertedSnafu};
use crate::token::{to_eth_address, tokens_to_wei, wei_to_tokens, TeaToken};

/// [`DistributionProvider`] that transfers TEA tokens from the provider's wallet.
///
/// The provider must carry a wallet filler; gas, nonce and chain id are filled by it.
pub struct TokenDistributor<P> {
    /// Wallet-enabled RPC provider.
    provider: P,
    /// Token contract address.
    token: EthAddress,
}

impl<P> TokenDistributor<P>
where
    P: Provider<Ethereum> + Clone,
{
    /// Creates a distributor for the token at `token`.
    pub fn new(provider: P, token: EthAddress) -> Self {
        Self { provider, token }
    }

    /// Sends `amount` tokens to `recipient` and waits for the receipt.
    ///
    /// Returns the transaction hash. A mined but reverted transaction is an error.
    pub async fn transfer(&self, recipient: &Address, amount: &BigDecimal) -> Result<String> {
        let to = to_eth_address(recipient)?;
        let value = tokens_to_wei(amount)?;
        let contract = TeaToken::new(self.token, self.provider.clone());

        let receipt = contract
            .transfer(to, value)
            .send()
            .await
            .context(ContractSnafu)?
            .get_receipt()
            .await
            .context(PendingTransactionSnafu)?;

        let transaction_id = receipt.transaction_hash.to_string();
        ensure!(receipt.status(), RevertedSnafu { transaction_id });

        info!(
            "Transferred {} tokens to {} in block {:?}",
            amount, recipient, receipt.block_number
        );
        Ok(transaction_id)
    }

    /// Token balance of `owner`, in token units.
    pub async fn balance_of(&self, owner: &Address) -> Result<BigDecimal> {
        let owner = to_eth_address(owner)?;
        let contract = TeaToken::new(self.token, self.provider.clone());

        let balance = contract
            .balanceOf(owner)
            .call()
            .await
            .context(ContractSnafu)?
            ._0;
        wei_to_tokens(balance)
    }
}

#[async_trait]
impl<P> DistributionProvider for TokenDistributor<P>
where
    P: Provider<Ethereum> + Clone + 'static,
{
    async fn distribute(
        &self,
        recipient: &Address,
        amount: &BigDecimal,
    ) -> Result<String, BoxError> {
        Ok(self.transfer(recipient, amount).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::providers::ProviderBuilder;

    use super::*;
    use crate::error::NodeError;

    fn offline_distributor() -> TokenDistributor<impl Provider<Ethereum> + Clone> {
        let provider = ProviderBuilder::new().on_http("http://127.0.0.1:1".parse().unwrap());
        TokenDistributor::new(provider, EthAddress::ZERO)
    }

    #[tokio::test]
    async fn we_cannot_transfer_to_a_non_ethereum_address() {
        let distributor = offline_distributor();

        let result = distributor
            .transfer(&Address::new("octocat"), &BigDecimal::from(1))
            .await;

        assert!(matches!(result, Err(NodeError::EthAddress { .. })));
    }

    #[tokio::test]
    async fn we_cannot_transfer_a_negative_amount() {
        let distributor = offline_distributor();
        let recipient = Address::new("0x00000000000000000000000000000000000000b0");

        let error = distributor
            .distribute(&recipient, &BigDecimal::from_str("-0.5").unwrap())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("negative"));
    }
}
