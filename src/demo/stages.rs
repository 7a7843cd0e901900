//! The three demo stages and the transactions they build.

use crate::config::{DemoConfig, IssuanceConfig};
use crate::demo::report;
use crate::demo::{DemoError, Stage};
use crate::ledger::client::Ledger;
use crate::ledger::keys::AccountId;
use crate::ledger::transaction::{
    wait_for_validation, Amount, MptAmount, MptIssuanceCreate, MptIssuanceCreateFlags,
    Transaction, TransactionKind, TransactionSigner,
};
use crate::ledger::types::{LedgerError, MptIssuanceId, TransactionMeta, TxHash};
use crate::ledger::wallet::Wallet;

/// Capabilities every demo issuance is created with.
pub const BASE_ISSUANCE_FLAGS: [u32; 5] = [
    MptIssuanceCreateFlags::CAN_LOCK,
    MptIssuanceCreateFlags::CAN_ESCROW,
    MptIssuanceCreateFlags::CAN_TRADE,
    MptIssuanceCreateFlags::CAN_TRANSFER,
    MptIssuanceCreateFlags::CAN_CLAWBACK,
];

/// Issuance flags: the fixed capabilities plus `require_auth` from config.
pub fn issuance_flags(config: &IssuanceConfig) -> MptIssuanceCreateFlags {
    BASE_ISSUANCE_FLAGS
        .iter()
        .fold(MptIssuanceCreateFlags::empty(), |flags, &flag| flags.set(flag, true))
        .set(MptIssuanceCreateFlags::REQUIRE_AUTH, config.require_auth)
}

/// `MPTokenIssuanceCreate` from `issuer` at `sequence`.
pub fn issuance_create_tx(
    issuer: &impl TransactionSigner,
    sequence: u32,
    fee_drops: u64,
    config: &IssuanceConfig,
) -> Transaction {
    Transaction {
        account: issuer.account_id(),
        fee_drops,
        sequence,
        signing_pub_key: issuer.public_key(),
        kind: TransactionKind::MptIssuanceCreate(MptIssuanceCreate {
            flags: issuance_flags(config),
            transfer_fee: config.transfer_fee,
            asset_scale: config.asset_scale,
            maximum_amount: Some(config.maximum_amount),
            metadata: config.metadata.as_bytes().to_vec(),
        }),
    }
}

/// `MPTokenAuthorize` letting `holder` hold `issuance_id`.
pub fn authorize_tx(
    holder: &impl TransactionSigner,
    sequence: u32,
    fee_drops: u64,
    issuance_id: MptIssuanceId,
) -> Transaction {
    Transaction {
        account: holder.account_id(),
        fee_drops,
        sequence,
        signing_pub_key: holder.public_key(),
        kind: TransactionKind::MptAuthorize { issuance_id },
    }
}

/// `Payment` of `amount` MPT units from `issuer` to `destination`.
pub fn payment_tx(
    issuer: &impl TransactionSigner,
    destination: AccountId,
    sequence: u32,
    fee_drops: u64,
    amount: MptAmount,
) -> Transaction {
    Transaction {
        account: issuer.account_id(),
        fee_drops,
        sequence,
        signing_pub_key: issuer.public_key(),
        kind: TransactionKind::Payment {
            destination,
            amount: Amount::Mpt(amount),
        },
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    pub issuance_id: MptIssuanceId,
    pub issuance_hash: TxHash,
    pub authorize_hash: TxHash,
    pub transfer_hash: TxHash,
    /// Holder's validated balance after the transfer.
    pub holder_balance: u64,
}

/// Drives the issue → authorize → transfer sequence against a ledger.
pub struct MptDemo<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    config: &'a DemoConfig,
}

impl<'a, L: Ledger + ?Sized> MptDemo<'a, L> {
    pub fn new(ledger: &'a L, config: &'a DemoConfig) -> Self {
        Self { ledger, config }
    }

    /// Run all three stages with the configured accounts.
    pub async fn run(&self) -> Result<DemoOutcome, DemoError> {
        report::print_banner("XRPL MPT (Multi-Purpose Token) Demo");

        let accounts = &self.config.accounts;
        let issuer = Wallet::from_secret(&accounts.issuer_secret, "issuer")
            .map_err(DemoError::at(Stage::Setup))?;
        let holder = Wallet::from_secret(&accounts.recipient_secret, "recipient")
            .map_err(DemoError::at(Stage::Setup))?;
        println!("Issuer address: {}", issuer.address());
        println!("Recipient address: {}", holder.address());

        let (issuance_id, issuance_hash) = self.create_issuance(&issuer).await?;
        let authorize_hash = self.authorize_holder(&holder, issuance_id).await?;
        let (transfer_hash, holder_balance) = self.transfer(&issuer, &holder, issuance_id).await?;

        println!();
        report::print_banner("Demo completed successfully!");

        Ok(DemoOutcome {
            issuance_id,
            issuance_hash,
            authorize_hash,
            transfer_hash,
            holder_balance,
        })
    }

    /// Stage 1: create the issuance and read its ID from validated metadata.
    pub async fn create_issuance(
        &self,
        issuer: &impl TransactionSigner,
    ) -> Result<(MptIssuanceId, TxHash), DemoError> {
        const STAGE: Stage = Stage::Issuance;
        report::print_stage(1, "Creating MPT Issuance");

        let sequence = self.next_sequence(issuer.account_id(), STAGE).await?;
        let tx = issuance_create_tx(
            issuer,
            sequence,
            self.config.ledger.fee_drops,
            &self.config.issuance,
        );

        let (hash, meta) = self.submit_and_wait(STAGE, "MPT Issuance", issuer, tx).await?;

        let issuance_id = meta
            .mpt_issuance_id
            .ok_or(LedgerError::MissingIssuanceId(hash))
            .map_err(DemoError::at(STAGE))?;

        tracing::info!(%issuance_id, tx_hash = %hash, "MPT issuance created");
        println!("MpTokenIssuanceId: {}", issuance_id);
        Ok((issuance_id, hash))
    }

    /// Stage 2: the holder opts in to the issuance.
    pub async fn authorize_holder(
        &self,
        holder: &impl TransactionSigner,
        issuance_id: MptIssuanceId,
    ) -> Result<TxHash, DemoError> {
        const STAGE: Stage = Stage::Authorization;
        report::print_stage(2, "Authorizing MPT Holder");

        let sequence = self.next_sequence(holder.account_id(), STAGE).await?;
        let tx = authorize_tx(holder, sequence, self.config.ledger.fee_drops, issuance_id);

        let (hash, _) = self.submit_and_wait(STAGE, "MPT Authorize", holder, tx).await?;
        tracing::info!(holder = %holder.account_id(), %issuance_id, "Holder authorized");
        Ok(hash)
    }

    /// Stage 3: pay the configured amount to the holder and report the
    /// holder's resulting balance.
    pub async fn transfer(
        &self,
        issuer: &impl TransactionSigner,
        holder: &impl TransactionSigner,
        issuance_id: MptIssuanceId,
    ) -> Result<(TxHash, u64), DemoError> {
        const STAGE: Stage = Stage::Transfer;
        report::print_stage(3, "Transferring MPT Tokens");

        let amount = MptAmount::parse(issuance_id, &self.config.issuance.transfer_amount)
            .map_err(DemoError::at(STAGE))?;

        let sequence = self.next_sequence(issuer.account_id(), STAGE).await?;
        let tx = payment_tx(
            issuer,
            holder.account_id(),
            sequence,
            self.config.ledger.fee_drops,
            amount,
        );

        let (hash, _) = self.submit_and_wait(STAGE, "MPT Transfer", issuer, tx).await?;

        let balance = self
            .ledger
            .mpt_balance(&holder.account_id(), &issuance_id)
            .await
            .map_err(DemoError::at(STAGE))?;
        tracing::info!(holder = %holder.account_id(), balance, "Transfer validated");
        println!("Recipient MPT balance: {}", balance);

        Ok((hash, balance))
    }

    /// Fresh sequence for `account`, read right before building a transaction.
    async fn next_sequence(&self, account: AccountId, stage: Stage) -> Result<u32, DemoError> {
        let info = self
            .ledger
            .account_info(&account)
            .await
            .map_err(|e| {
                tracing::error!(account = %account, error = %e, "Error getting account info");
                DemoError::at(stage)(e)
            })?;
        tracing::debug!(account = %account, sequence = info.sequence, "Fetched account sequence");
        Ok(info.sequence)
    }

    /// Sign, submit, print the result and wait for validation.
    async fn submit_and_wait(
        &self,
        stage: Stage,
        label: &str,
        signer: &impl TransactionSigner,
        tx: Transaction,
    ) -> Result<(TxHash, TransactionMeta), DemoError> {
        let signed = signer.sign(tx).map_err(DemoError::at(stage))?;
        tracing::debug!(
            tx_type = signed.transaction.kind.name(),
            sequence = signed.transaction.sequence,
            tx_hash = %signed.hash,
            "Submitting transaction"
        );

        let submitted = self.ledger.submit(&signed).await.map_err(DemoError::at(stage))?;
        report::print_submission(label, &submitted, &self.config.ledger.explorer_url);

        let hash = submitted.hash.unwrap_or(signed.hash);
        if !submitted.engine_result.may_validate() {
            tracing::warn!(
                tx_hash = %hash,
                engine_result = %submitted.engine_result,
                message = %submitted.engine_result_message,
                "Submission rejected"
            );
            return Err(DemoError::at(stage)(LedgerError::Rejected {
                hash,
                result: submitted.engine_result.to_string(),
            }));
        }

        println!("Waiting for transaction to be validated...");
        let meta = wait_for_validation(self.ledger, hash, &self.config.confirmation)
            .await
            .map_err(DemoError::at(stage))?;
        Ok((hash, meta))
    }
}
