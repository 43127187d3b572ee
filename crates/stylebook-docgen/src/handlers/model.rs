use async_trait::async_trait;

use super::{Handler, HandlerContext};
use crate::model::{Documentation, ModelDescriptor};
use crate::syntax::{ComponentDefinition, Expr, MemberKind};
use crate::Result;

const DEFAULT_MODEL_PROP: &str = "value";
const DEFAULT_MODEL_EVENT: &str = "input";

/// Documents a customized `v-model` binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelHandler;

#[async_trait]
impl Handler for ModelHandler {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn handle(
        &self,
        doc: &mut Documentation,
        definition: &ComponentDefinition,
        _ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        if let Some(model) = definition
            .options()
            .and_then(|options| options.get("model"))
            .and_then(Expr::as_object)
        {
            doc.model = Some(ModelDescriptor {
                prop: model
                    .get("prop")
                    .and_then(Expr::as_str)
                    .unwrap_or(DEFAULT_MODEL_PROP)
                    .to_string(),
                event: model
                    .get("event")
                    .and_then(Expr::as_str)
                    .unwrap_or(DEFAULT_MODEL_EVENT)
                    .to_string(),
            });
        }

        let decorated = definition.class().and_then(|class| {
            class.members.iter().find_map(|member| {
                let decorator = member.decorator(&["Model"])?;
                (member.kind == MemberKind::Field).then_some((member, decorator))
            })
        });
        if let Some((member, decorator)) = decorated {
            let event = decorator
                .arguments
                .first()
                .and_then(Expr::as_str)
                .unwrap_or(DEFAULT_MODEL_EVENT);
            doc.model = Some(ModelDescriptor {
                prop: member.name.clone(),
                event: event.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::run;

    #[tokio::test]
    async fn documents_model_option() {
        let doc = run(
            &ModelHandler,
            "export default { model: { prop: 'checked', event: 'change' } }",
        )
        .await;
        assert_eq!(
            doc.model,
            Some(ModelDescriptor {
                prop: "checked".into(),
                event: "change".into()
            })
        );
    }

    #[tokio::test]
    async fn partial_model_uses_vue_defaults() {
        let doc = run(&ModelHandler, "export default { model: { event: 'change' } }").await;
        assert_eq!(doc.model.unwrap().prop, "value");
    }

    #[tokio::test]
    async fn documents_model_decorator() {
        let doc = run(
            &ModelHandler,
            r#"
            @Component
            export default class Toggle extends Vue {
              @Model('toggle', { type: Boolean }) readonly on!: boolean
            }
            "#,
        )
        .await;
        let model = doc.model.unwrap();
        assert_eq!((model.prop.as_str(), model.event.as_str()), ("on", "toggle"));
    }

    #[tokio::test]
    async fn no_model_by_default() {
        let doc = run(&ModelHandler, "export default { name: 'A' }").await;
        assert!(doc.model.is_none());
    }
}
