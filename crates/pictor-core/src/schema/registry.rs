//! The static transformation catalogue.

use super::rules::Rule;
use super::{FieldDescriptor, FieldGroup, FieldValue, InputKind, StaticValue, TransformationKind, ValueMap};

const FOCUS_ANCHORS: &[&str] = &[
    "center",
    "top",
    "left",
    "bottom",
    "right",
    "top_left",
    "top_right",
    "bottom_left",
    "bottom_right",
];

fn text_is(values: &ValueMap, field: &str, expected: &str) -> bool {
    values.get(field).and_then(FieldValue::as_str) == Some(expected)
}

fn bg_is_color(v: &ValueMap) -> bool {
    text_is(v, "background_type", "color")
}

fn bg_is_blurred(v: &ValueMap) -> bool {
    text_is(v, "background_type", "blurred")
}

fn bg_is_generative_fill(v: &ValueMap) -> bool {
    text_is(v, "background_type", "generative_fill")
}

/// Focus only matters when the resize actually crops.
fn resize_crops(v: &ValueMap) -> bool {
    match v.get("crop").and_then(FieldValue::as_str) {
        None | Some("maintain_ratio") => !text_is(v, "crop_mode", "pad_resize"),
        Some(_) => false,
    }
}

fn focus_is_anchor(v: &ValueMap) -> bool {
    resize_crops(v) && text_is(v, "focus_type", "anchor")
}

fn focus_is_object(v: &ValueMap) -> bool {
    resize_crops(v) && text_is(v, "focus_type", "object")
}

const fn field(
    name: &'static str,
    label: &'static str,
    input: InputKind,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        label,
        param: name,
        input,
        group: None,
        visible_when: None,
    }
}

const fn grouped(
    name: &'static str,
    label: &'static str,
    input: InputKind,
    group: FieldGroup,
    visible_when: Option<fn(&ValueMap) -> bool>,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        label,
        param: group.param(),
        input,
        group: Some(group),
        visible_when,
    }
}

const fn number(min: f64, max: f64, step: f64) -> InputKind {
    InputKind::Number { min, max, step }
}

const BACKGROUND_FIELDS: &[FieldDescriptor] = &[
    grouped(
        "background_type",
        "Background type",
        InputKind::Select {
            options: &["color", "blurred", "generative_fill"],
        },
        FieldGroup::Background,
        None,
    ),
    grouped(
        "background_color",
        "Color",
        InputKind::Color,
        FieldGroup::Background,
        Some(bg_is_color),
    ),
    grouped(
        "background_blur_intensity",
        "Blur intensity",
        InputKind::AutoOrNumber { min: 1.0, max: 100.0 },
        FieldGroup::Background,
        Some(bg_is_blurred),
    ),
    grouped(
        "background_blur_brightness",
        "Blur brightness",
        number(-255.0, 255.0, 1.0),
        FieldGroup::Background,
        Some(bg_is_blurred),
    ),
    grouped(
        "background_prompt",
        "Prompt",
        InputKind::Text,
        FieldGroup::Background,
        Some(bg_is_generative_fill),
    ),
];

const EXTENDER_FIELDS: &[FieldDescriptor] = &[
    field("width", "Width", InputKind::Dimension),
    field("height", "Height", InputKind::Dimension),
    grouped(
        "extend_prompt",
        "Prompt",
        InputKind::Text,
        FieldGroup::GenerativeFill,
        None,
    ),
];

const EXTRACT_FIELDS: &[FieldDescriptor] = &[
    field("x", "X", number(0.0, f64::MAX, 1.0)),
    field("y", "Y", number(0.0, f64::MAX, 1.0)),
    field("width", "Width", InputKind::Dimension),
    field("height", "Height", InputKind::Dimension),
];

const RESIZE_FIELDS: &[FieldDescriptor] = &[
    field("width", "Width", InputKind::Dimension),
    field("height", "Height", InputKind::Dimension),
    field("aspect_ratio", "Aspect ratio", InputKind::Text),
    field(
        "crop",
        "Crop strategy",
        InputKind::Select {
            options: &["maintain_ratio", "force", "at_max", "at_least"],
        },
    ),
    field(
        "crop_mode",
        "Crop mode",
        InputKind::Select {
            options: &["pad_resize", "extract", "pad_extract"],
        },
    ),
    grouped(
        "focus_type",
        "Focus",
        InputKind::Select {
            options: &["auto", "anchor", "object"],
        },
        FieldGroup::Focus,
        Some(resize_crops),
    ),
    grouped(
        "focus_anchor",
        "Anchor",
        InputKind::Select {
            options: FOCUS_ANCHORS,
        },
        FieldGroup::Focus,
        Some(focus_is_anchor),
    ),
    grouped(
        "focus_object",
        "Object",
        InputKind::Text,
        FieldGroup::Focus,
        Some(focus_is_object),
    ),
];

const UNSHARP_FIELDS: &[FieldDescriptor] = &[
    grouped("radius", "Radius", number(0.0, 100.0, 0.1), FieldGroup::UnsharpMask, None),
    grouped("sigma", "Sigma", number(0.0, 100.0, 0.1), FieldGroup::UnsharpMask, None),
    grouped("amount", "Amount", number(0.0, 10.0, 0.01), FieldGroup::UnsharpMask, None),
    grouped(
        "threshold",
        "Threshold",
        number(0.0, 1.0, 0.001),
        FieldGroup::UnsharpMask,
        None,
    ),
];

const UPSCALER_FIELDS: &[FieldDescriptor] = &[
    field("upscale", "Upscale", InputKind::Toggle),
    field("width", "Width", number(1.0, f64::MAX, 1.0)),
    field("height", "Height", number(1.0, f64::MAX, 1.0)),
];

/// Every transformation kind the editor knows, in catalogue order.
pub static REGISTRY: &[TransformationKind] = &[
    TransformationKind {
        key: "background",
        name: "Background",
        defaults: &[("background_type", StaticValue::Text("color"))],
        fields: BACKGROUND_FIELDS,
        rules: &[Rule::AutoOrRange {
            field: "background_blur_intensity",
            min: 1.0,
            max: 100.0,
        }],
        fixed: &[],
    },
    TransformationKind {
        key: "ai_image_extender",
        name: "AI image extender",
        defaults: &[],
        fields: EXTENDER_FIELDS,
        rules: &[Rule::AtLeastOneOf {
            fields: &["width", "height"],
        }],
        fixed: &[("crop_mode", StaticValue::Text("pad_resize"))],
    },
    TransformationKind {
        key: "extract",
        name: "Crop",
        defaults: &[("x", StaticValue::Number(0.0)), ("y", StaticValue::Number(0.0))],
        fields: EXTRACT_FIELDS,
        rules: &[
            Rule::Required { field: "width" },
            Rule::Required { field: "height" },
        ],
        fixed: &[("crop_mode", StaticValue::Text("extract"))],
    },
    TransformationKind {
        key: "resize",
        name: "Resize",
        defaults: &[],
        fields: RESIZE_FIELDS,
        rules: &[
            Rule::AtLeastOneOf {
                fields: &["width", "height", "aspect_ratio"],
            },
            Rule::AtMostOf {
                fields: &["width", "height", "aspect_ratio"],
                max: 2,
            },
            Rule::AspectRatio {
                field: "aspect_ratio",
            },
        ],
        fixed: &[],
    },
    TransformationKind {
        key: "grayscale",
        name: "Grayscale",
        defaults: &[("grayscale", StaticValue::Bool(true))],
        fields: &[field("grayscale", "Grayscale", InputKind::Toggle)],
        rules: &[],
        fixed: &[],
    },
    TransformationKind {
        key: "contrast",
        name: "Contrast stretch",
        defaults: &[("contrast", StaticValue::Bool(true))],
        fields: &[field("contrast", "Contrast", InputKind::Toggle)],
        rules: &[],
        fixed: &[],
    },
    TransformationKind {
        key: "sharpen",
        name: "Sharpen",
        defaults: &[("sharpen", StaticValue::Number(10.0))],
        fields: &[field("sharpen", "Amount", number(1.0, 100.0, 1.0))],
        rules: &[Rule::Required { field: "sharpen" }],
        fixed: &[],
    },
    TransformationKind {
        key: "unsharp_mask",
        name: "Unsharp mask",
        defaults: &[
            ("radius", StaticValue::Number(2.0)),
            ("sigma", StaticValue::Number(2.0)),
            ("amount", StaticValue::Number(0.8)),
            ("threshold", StaticValue::Number(0.024)),
        ],
        fields: UNSHARP_FIELDS,
        rules: &[
            Rule::Required { field: "radius" },
            Rule::Required { field: "sigma" },
            Rule::Required { field: "amount" },
            Rule::Required { field: "threshold" },
        ],
        fixed: &[],
    },
    TransformationKind {
        key: "ai_upscaler",
        name: "AI upscaler",
        defaults: &[("upscale", StaticValue::Bool(true))],
        fields: UPSCALER_FIELDS,
        rules: &[Rule::Required { field: "upscale" }],
        fixed: &[],
    },
    TransformationKind {
        key: "ai_retouch",
        name: "AI retouch",
        defaults: &[("retouch", StaticValue::Bool(true))],
        fields: &[field("retouch", "Retouch", InputKind::Toggle)],
        rules: &[Rule::Required { field: "retouch" }],
        fixed: &[],
    },
    TransformationKind {
        key: "rotate",
        name: "Rotate",
        defaults: &[("rotation", StaticValue::Number(90.0))],
        fields: &[field("rotation", "Angle", number(-360.0, 360.0, 1.0))],
        rules: &[Rule::Required { field: "rotation" }],
        fixed: &[],
    },
    TransformationKind {
        key: "flip",
        name: "Flip",
        defaults: &[("flip", StaticValue::Text("h"))],
        fields: &[field(
            "flip",
            "Direction",
            InputKind::Select {
                options: &["h", "v", "h_v"],
            },
        )],
        rules: &[Rule::Required { field: "flip" }],
        fixed: &[],
    },
    TransformationKind {
        key: "blur",
        name: "Blur",
        defaults: &[("blur", StaticValue::Number(10.0))],
        fields: &[field("blur", "Radius", number(1.0, 100.0, 1.0))],
        rules: &[Rule::Required { field: "blur" }],
        fixed: &[],
    },
    TransformationKind {
        key: "quality",
        name: "Quality",
        defaults: &[("quality", StaticValue::Number(80.0))],
        fields: &[field("quality", "Quality", number(1.0, 100.0, 1.0))],
        rules: &[Rule::Required { field: "quality" }],
        fixed: &[],
    },
    TransformationKind {
        key: "format",
        name: "Format",
        defaults: &[("format", StaticValue::Text("auto"))],
        fields: &[field(
            "format",
            "Format",
            InputKind::Select {
                options: &["auto", "webp", "jpg", "png", "avif"],
            },
        )],
        rules: &[Rule::Required { field: "format" }],
        fixed: &[],
    },
];
