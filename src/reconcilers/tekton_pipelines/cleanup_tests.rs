// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for Tekton pipelines cleanup.

#[cfg(test)]
mod tests {
    use crate::context::FeatureGates;
    use crate::reconcilers::test_support::{test_bundle, test_request, FakeGateway, Op};
    use crate::reconcilers::{CleanupOutcome, Operand, TektonPipelines};
    use std::sync::Arc;

    fn operand() -> TektonPipelines {
        TektonPipelines::new(Arc::new(test_bundle()))
    }

    #[tokio::test]
    async fn test_cleanup_removes_everything_reconciled() {
        let gateway = FakeGateway::with_tekton();
        let request = test_request().with_namespace_override("openshift-cnv");
        let operand = operand();
        operand.reconcile(&request, &gateway).await.unwrap();

        let results = operand.cleanup(&request, &gateway).await.unwrap();

        assert_eq!(results.len(), test_bundle().len());
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, CleanupOutcome::Deleted)));
        assert!(gateway.objects().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_of_absent_objects_succeeds() {
        let gateway = FakeGateway::new();

        let results = operand().cleanup(&test_request(), &gateway).await.unwrap();

        assert_eq!(results.len(), test_bundle().len());
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, CleanupOutcome::AlreadyAbsent)));
    }

    #[tokio::test]
    async fn test_cleanup_ignores_feature_gate() {
        let gateway = FakeGateway::with_tekton();
        let operand = operand();
        operand.reconcile(&test_request(), &gateway).await.unwrap();

        let disabled = test_request().with_feature_gates(FeatureGates::default());
        operand.cleanup(&disabled, &gateway).await.unwrap();

        assert_eq!(gateway.count(Op::Delete), test_bundle().len());
        assert!(gateway.objects().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_continues_past_failures() {
        let gateway = FakeGateway::with_tekton();
        let operand = operand();
        operand.reconcile(&test_request(), &gateway).await.unwrap();
        gateway.fail_on(Op::Delete, "windows-efi-installer-config");

        let results = operand.cleanup(&test_request(), &gateway).await.unwrap();

        assert_eq!(results.len(), test_bundle().len());
        let failed: Vec<_> = results
            .iter()
            .filter(|r| matches!(r.outcome, CleanupOutcome::Failed(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].resource.name(), "windows-efi-installer-config");
        assert_eq!(gateway.objects().len(), 1);
    }
}
