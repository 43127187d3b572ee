use std::sync::Arc;

use stylebook_docgen::handlers::{default_handlers, ClassPropHandler, PropHandler};
use stylebook_docgen::{
    DefaultValue, DocGen, DocgenError, Handler, ParseCache, ParseOptions, TypeDescriptor,
};

fn docgen() -> DocGen {
    DocGen::new().with_cache(Arc::new(ParseCache::unbounded()))
}

const BUTTON: &str = r#"
import { defineComponent, PropType } from 'vue'

/**
 *   A themable button.
 *
 * @author Design team
 */
export default defineComponent({
  name: 'AppButton',
  props: {
    /**
     * Visual theme
     * @values dark, light
     */
    theme: { type: String, default: 'hello' },
    /** Size of the control */
    size: { type: String as PropType<'A' | 'B' | 'C'>, required: true },
    count: { type: Number, default: 0 },
  },
  data() {
    return { pressed: false }
  },
  computed: {
    /** Classes applied to the root */
    classes() {
      return ['btn', this.theme]
    },
  },
  methods: {
    /**
     * Focuses the button
     * @public
     */
    focus() {
      this.$el.focus()
    },
    onClick(event) {
      /** Fired on click */
      this.$emit('click', event)
    },
  },
  render(h) {
    return h('button', this.$slots.default)
  },
})
"#;

#[tokio::test]
async fn single_export_produces_one_record() {
    let doc = docgen()
        .parse_source(BUTTON, &ParseOptions::new("src/Button.ts"))
        .await
        .expect("extraction should succeed");

    assert_eq!(doc.export_name, "default");
    assert_eq!(doc.display_name.as_deref(), Some("AppButton"));
    assert_eq!(doc.description.as_deref(), Some("A themable button."));
    assert_eq!(doc.tags["author"][0].description.as_deref(), Some("Design team"));

    let theme = &doc.props["theme"];
    assert_eq!(theme.default_value, Some(DefaultValue::new("\"hello\"", false)));
    assert_eq!(theme.values, Some(vec!["dark".to_string(), "light".to_string()]));
    assert!(!theme.required);

    let size = &doc.props["size"];
    assert!(size.required);
    assert_eq!(size.type_, Some(TypeDescriptor::named("A | B | C")));
    assert_eq!(
        size.values,
        Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
    );

    assert_eq!(
        doc.props["count"].default_value,
        Some(DefaultValue::new("0", false))
    );
    assert!(doc.data.contains_key("pressed"));
    assert!(doc.computed.contains_key("classes"));
    assert!(doc.methods.contains_key("focus"));
    assert!(!doc.methods.contains_key("onClick"));
    assert_eq!(doc.events["click"].description.as_deref(), Some("Fired on click"));
    assert!(doc.slots.contains_key("default"));
}

#[tokio::test]
async fn zero_exports_is_a_resolution_error() {
    let err = docgen()
        .parse_source("const helper = 1\nexport { helper }", &ParseOptions::new("src/util.js"))
        .await
        .unwrap_err();
    assert!(matches!(err, DocgenError::NoDefinition { .. }));
    assert!(err.to_string().contains("No suitable component definition found"));
    assert!(err.to_string().contains("util.js"));
}

const TWO_COMPONENTS: &str = r#"
export const Card = { props: { title: String } }
export default { name: 'CardList', props: { items: Array } }
"#;

#[tokio::test]
async fn several_exports_need_multi_mode() {
    let options = ParseOptions::new("src/cards.js");

    let err = docgen().parse_source(TWO_COMPONENTS, &options).await.unwrap_err();
    assert!(matches!(err, DocgenError::MultipleExports { count: 2, .. }));

    let docs = docgen().parse_multi_source(TWO_COMPONENTS, &options).await.unwrap();
    let exports: Vec<_> = docs.iter().map(|doc| doc.export_name.as_str()).collect();
    assert_eq!(exports, ["Card", "default"]);
    assert!(docs[0].props.contains_key("title"));
    assert!(docs[1].props.contains_key("items"));
}

#[tokio::test]
async fn name_filter_selects_exports() {
    let options = ParseOptions::new("src/cards.js").with_name_filter(["Card"]);
    let doc = docgen().parse_source(TWO_COMPONENTS, &options).await.unwrap();
    assert_eq!(doc.export_name, "Card");
}

#[tokio::test]
async fn cache_returns_identical_records() {
    let cache = Arc::new(ParseCache::unbounded());
    let docgen = DocGen::new().with_cache(Arc::clone(&cache));
    let options = ParseOptions::new("src/Button.ts");

    let first = docgen.parse_source(BUTTON, &options).await.unwrap();
    let second = docgen.parse_source(BUTTON, &options).await.unwrap();
    assert_eq!(first, second);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn decorator_union_is_structured() {
    let source = r#"
    import { Component, Prop, Vue } from 'vue-property-decorator'

    @Component
    export default class Tag extends Vue {
      /**
       * Text of the tag
       */
      @Prop({ type: [String, Number], default: 'hello', required: true })
      readonly label!: string | number

      @Prop() readonly variant!: 'solid' | 'outline'
    }
    "#;
    let doc = docgen().parse_source(source, &ParseOptions::new("Tag.ts")).await.unwrap();

    let label = &doc.props["label"];
    assert_eq!(
        label.type_,
        Some(TypeDescriptor::union(vec![
            TypeDescriptor::named("string"),
            TypeDescriptor::named("number"),
        ]))
    );
    assert_eq!(label.default_value, Some(DefaultValue::new("\"hello\"", false)));
    assert!(label.required);
    assert_eq!(label.description.as_deref(), Some("Text of the tag"));

    let variant = &doc.props["variant"];
    assert_eq!(variant.type_.as_ref().map(|ty| ty.name.as_str()), Some("union"));
    assert_eq!(
        variant.values,
        Some(vec!["solid".to_string(), "outline".to_string()])
    );
    assert_eq!(doc.display_name.as_deref(), Some("Tag"));
}

#[tokio::test]
async fn handler_order_does_not_change_the_record() {
    let forward = default_handlers();
    let mut reversed = default_handlers();
    reversed.reverse();

    let options = ParseOptions::new("src/Button.ts");
    let a = docgen()
        .with_handlers(forward)
        .parse_source(BUTTON, &options)
        .await
        .unwrap();
    let b = docgen()
        .with_handlers(reversed)
        .parse_source(BUTTON, &options)
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn decorated_props_win_over_component_options_in_any_order() {
    let source = r#"
    @Component({ props: { size: String } })
    export default class Chip extends Vue {
      @Prop({ type: Number }) readonly size!: number
    }
    "#;
    let options = ParseOptions::new("Chip.ts");
    let orders: [Vec<Box<dyn Handler>>; 2] = [
        vec![Box::new(PropHandler), Box::new(ClassPropHandler)],
        vec![Box::new(ClassPropHandler), Box::new(PropHandler)],
    ];
    for handlers in orders {
        let doc = docgen()
            .with_handlers(handlers)
            .parse_source(source, &options)
            .await
            .unwrap();
        assert_eq!(doc.props["size"].type_, Some(TypeDescriptor::named("number")));
    }
}

#[tokio::test]
async fn handler_errors_propagate() {
    let source = r#"
    @Component
    export default class Broken extends Vue {
      @PropSync() value!: string
    }
    "#;
    let err = docgen().parse_source(source, &ParseOptions::new("Broken.ts")).await.unwrap_err();
    assert!(matches!(err, DocgenError::Handler { handler: "classProps", .. }));
}

#[tokio::test]
async fn parse_errors_name_the_file() {
    let err = docgen()
        .parse_source("export default {", &ParseOptions::new("src/Bad.js"))
        .await
        .unwrap_err();
    assert!(matches!(err, DocgenError::Parse { .. }));
    assert!(err.to_string().contains("Bad.js"));
}

#[tokio::test]
async fn serializes_to_camel_case_json() {
    let doc = docgen()
        .parse_source(BUTTON, &ParseOptions::new("src/Button.ts"))
        .await
        .unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["exportName"], "default");
    assert_eq!(json["displayName"], "AppButton");
    assert_eq!(json["props"]["theme"]["defaultValue"]["value"], "\"hello\"");
    assert_eq!(json["props"]["size"]["type"]["name"], "A | B | C");
    assert!(json["props"]["size"]["type"].get("elements").is_none());
    assert!(json.get("model").is_none());
}
