// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use ventra_core::traits::ai::PaymentProofVerdict;
use ventra_core::{ConversationBatch, MessageKind};

use crate::classify::additional_text;
use crate::processor::{ProcessOutcome, ProcessorContext, TypeProcessor};

/// Instruction for the general describe-what-you-see path.
const DESCRIBE_INSTRUCTION: &str =
    "Describe brevemente el contenido de esta imagen en el contexto de una conversacion de ventas.";

/// Instruction for the payment-proof path; the collaborator answers with
/// a JSON object carrying the verdict fields.
const PAYMENT_PROOF_INSTRUCTION: &str = "Analiza si esta imagen es un comprobante de pago. \
    Responde con un objeto JSON con los campos: is_proof_payment (bool), valid_amount (bool), \
    amount_found (string|null), valid_name (bool), name_found (string|null), resume (string).";

/// Image batches: vision analysis, payment-proof aware.
pub struct ImageProcessor;

#[async_trait]
impl TypeProcessor for ImageProcessor {
    fn kind(&self) -> MessageKind {
        MessageKind::Image
    }

    async fn process(&self, batch: &ConversationBatch, ctx: &ProcessorContext) -> ProcessOutcome {
        let key = batch.key();
        let sale = ctx.current_sale(key).await;
        if sale.is_some() {
            ctx.send_holding(key).await;
        } else {
            debug!(%key, "no pending sale, holding message suppressed");
        }
        let expecting_proof = sale.as_ref().is_some_and(|s| s.awaiting_confirmation);

        let instruction = if expecting_proof {
            PAYMENT_PROOF_INSTRUCTION
        } else {
            DESCRIBE_INSTRUCTION
        };
        let mut analyses = Vec::new();
        for msg in batch.of_kind(MessageKind::Image) {
            let Some(image) = msg.media_reference() else {
                debug!(message_id = %msg.id, "image without media reference, skipped");
                continue;
            };
            let description = match ctx.ai.analyze_image(&image, instruction, &ctx.bot).await {
                Ok(description) => description,
                Err(e) => return ctx.ai_error(&e),
            };
            let line = if expecting_proof {
                match PaymentProofVerdict::from_description(&description) {
                    Some(verdict) => render_verdict(&verdict),
                    None => format!("[imagen analizada]: {description}"),
                }
            } else {
                format!("[imagen analizada]: {description}")
            };
            analyses.push(line);
        }

        if analyses.is_empty() {
            return ProcessOutcome::failed("image batch carried no fetchable image");
        }

        let mut ai_text = analyses.join("\n");
        if let Some(extra) = additional_text(batch) {
            ai_text.push('\n');
            ai_text.push_str(&extra);
        }
        ProcessOutcome::Interpreted {
            kind: MessageKind::Image,
            ai_text,
        }
    }
}

fn render_verdict(verdict: &PaymentProofVerdict) -> String {
    format!(
        "[comprobante analizado]: es_comprobante={} monto_valido={} monto={} nombre_valido={} nombre={} resumen={}",
        verdict.is_proof_payment,
        verdict.valid_amount,
        verdict.amount_found.as_deref().unwrap_or("-"),
        verdict.valid_name,
        verdict.name_found.as_deref().unwrap_or("-"),
        verdict.resume.as_deref().unwrap_or("-"),
    )
}
