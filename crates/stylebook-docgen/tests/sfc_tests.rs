use std::sync::Arc;

use stylebook_docgen::{DocGen, DocgenError, ParseCache, ParseOptions, TypeDescriptor};

fn docgen() -> DocGen {
    DocGen::new().with_cache(Arc::new(ParseCache::unbounded()))
}

const MODAL: &str = r#"
<template>
  <div class="modal">
    <header>
      <!--
        @slot Modal title
        @binding {string} title current title
      -->
      <slot name="header" :title="title" />
    </header>
    <!-- @slot Modal body -->
    <slot />
    <button @click="$emit('close')">Close</button>
  </div>
</template>

<script lang="ts">
import { Component, Prop, Vue } from 'vue-property-decorator'

/**
 * A dialog window.
 */
@Component
export default class Modal extends Vue {
  /** Whether the modal is visible */
  @Prop({ type: Boolean, default: false }) readonly open!: boolean

  /** Extra width in pixels */
  @Prop() readonly width?: number

  title = 'Untitled'
}
</script>

<docs>
```vue
<Modal open>Hello</Modal>
```
</docs>
"#;

#[tokio::test]
async fn documents_script_template_and_docs_blocks() {
    let doc = docgen()
        .parse_source(MODAL, &ParseOptions::new("src/Modal.vue"))
        .await
        .expect("extraction should succeed");

    assert_eq!(doc.display_name.as_deref(), Some("Modal"));
    assert_eq!(doc.description.as_deref(), Some("A dialog window."));

    let open = &doc.props["open"];
    assert_eq!(open.type_, Some(TypeDescriptor::named("boolean")));
    assert_eq!(open.default_value.as_ref().map(|d| d.value.as_str()), Some("false"));
    assert_eq!(doc.props["width"].type_, Some(TypeDescriptor::named("number")));

    assert!(doc.data.contains_key("title"));
    assert!(!doc.data.contains_key("open"));

    let header = &doc.slots["header"];
    assert!(header.scoped);
    assert_eq!(header.description.as_deref(), Some("Modal title"));
    assert_eq!(header.bindings[0].type_, Some(TypeDescriptor::named("string")));
    assert_eq!(doc.slots["default"].description.as_deref(), Some("Modal body"));

    assert!(doc.events.contains_key("close"));
    assert_eq!(doc.docs_blocks.len(), 1);
    assert!(doc.docs_blocks[0].starts_with("```vue"));
}

#[tokio::test]
async fn reads_components_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Modal.vue");
    std::fs::write(&path, MODAL).unwrap();

    let from_disk = docgen().parse(&path, &ParseOptions::default()).await.unwrap();
    let from_source = docgen()
        .parse_source(MODAL, &ParseOptions::new(&path))
        .await
        .unwrap();
    assert_eq!(from_disk, from_source);
}

#[tokio::test]
async fn unclosed_blocks_fail() {
    let err = docgen()
        .parse_source("<script>export default {}", &ParseOptions::new("Broken.vue"))
        .await
        .unwrap_err();
    assert!(matches!(err, DocgenError::Sfc { .. }));
}

#[tokio::test]
async fn setup_scripts_with_define_component_are_documented() {
    let source = r#"
<script setup lang="ts">
export default defineComponent({
  props: { label: String },
})
</script>
"#;
    let doc = docgen()
        .parse_source(source, &ParseOptions::new("Label.vue"))
        .await
        .unwrap();
    assert!(doc.props.contains_key("label"));
    assert_eq!(doc.display_name.as_deref(), Some("Label"));
}
