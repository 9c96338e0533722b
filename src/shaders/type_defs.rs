use ash::vk;

/// a reflected type code, either a GL type enum or a raw `vk::Format`
pub type TypeCode = i64;

/// returned for GL types with no vertex format (samplers, matrices, bools)
pub const UNMAPPED: TypeCode = -1;

// GL type enums, from glcorearb.h and ARB_gpu_shader_int64
pub const GL_FLOAT: u32 = 0x1406;
pub const GL_FLOAT_VEC2: u32 = 0x8B50;
pub const GL_FLOAT_VEC3: u32 = 0x8B51;
pub const GL_FLOAT_VEC4: u32 = 0x8B52;
pub const GL_DOUBLE: u32 = 0x140A;
pub const GL_DOUBLE_VEC2: u32 = 0x8FFC;
pub const GL_DOUBLE_VEC3: u32 = 0x8FFD;
pub const GL_DOUBLE_VEC4: u32 = 0x8FFE;
pub const GL_INT: u32 = 0x1404;
pub const GL_INT_VEC2: u32 = 0x8B53;
pub const GL_INT_VEC3: u32 = 0x8B54;
pub const GL_INT_VEC4: u32 = 0x8B55;
pub const GL_UNSIGNED_INT: u32 = 0x1405;
pub const GL_UNSIGNED_INT_VEC2: u32 = 0x8DC6;
pub const GL_UNSIGNED_INT_VEC3: u32 = 0x8DC7;
pub const GL_UNSIGNED_INT_VEC4: u32 = 0x8DC8;
pub const GL_INT64_ARB: u32 = 0x140E;
pub const GL_INT64_VEC2_ARB: u32 = 0x8FE9;
pub const GL_INT64_VEC3_ARB: u32 = 0x8FEA;
pub const GL_INT64_VEC4_ARB: u32 = 0x8FEB;
pub const GL_UNSIGNED_INT64_ARB: u32 = 0x140F;
pub const GL_UNSIGNED_INT64_VEC2_ARB: u32 = 0x8FF5;
pub const GL_UNSIGNED_INT64_VEC3_ARB: u32 = 0x8FF6;
pub const GL_UNSIGNED_INT64_VEC4_ARB: u32 = 0x8FF7;

/// every GL type that has a vulkan vertex attribute format
pub const GL_TO_VK_FORMAT: [(u32, vk::Format); 24] = [
    (GL_FLOAT, vk::Format::R32_SFLOAT),
    (GL_FLOAT_VEC2, vk::Format::R32G32_SFLOAT),
    (GL_FLOAT_VEC3, vk::Format::R32G32B32_SFLOAT),
    (GL_FLOAT_VEC4, vk::Format::R32G32B32A32_SFLOAT),
    (GL_DOUBLE, vk::Format::R64_SFLOAT),
    (GL_DOUBLE_VEC2, vk::Format::R64G64_SFLOAT),
    (GL_DOUBLE_VEC3, vk::Format::R64G64B64_SFLOAT),
    (GL_DOUBLE_VEC4, vk::Format::R64G64B64A64_SFLOAT),
    (GL_INT, vk::Format::R32_SINT),
    (GL_INT_VEC2, vk::Format::R32G32_SINT),
    (GL_INT_VEC3, vk::Format::R32G32B32_SINT),
    (GL_INT_VEC4, vk::Format::R32G32B32A32_SINT),
    (GL_UNSIGNED_INT, vk::Format::R32_UINT),
    (GL_UNSIGNED_INT_VEC2, vk::Format::R32G32_UINT),
    (GL_UNSIGNED_INT_VEC3, vk::Format::R32G32B32_UINT),
    (GL_UNSIGNED_INT_VEC4, vk::Format::R32G32B32A32_UINT),
    (GL_INT64_ARB, vk::Format::R64_SINT),
    (GL_INT64_VEC2_ARB, vk::Format::R64G64_SINT),
    (GL_INT64_VEC3_ARB, vk::Format::R64G64B64_SINT),
    (GL_INT64_VEC4_ARB, vk::Format::R64G64B64A64_SINT),
    (GL_UNSIGNED_INT64_ARB, vk::Format::R64_UINT),
    (GL_UNSIGNED_INT64_VEC2_ARB, vk::Format::R64G64_UINT),
    (GL_UNSIGNED_INT64_VEC3_ARB, vk::Format::R64G64B64_UINT),
    (GL_UNSIGNED_INT64_VEC4_ARB, vk::Format::R64G64B64A64_UINT),
];

pub fn gl_to_vk_format(gl_type: u32) -> Option<vk::Format> {
    GL_TO_VK_FORMAT
        .iter()
        .find(|(gl, _)| *gl == gl_type)
        .map(|(_, format)| *format)
}

/// the type code written for an attribute
///
/// with `vulkan_def` the GL type becomes a raw `vk::Format`, or `UNMAPPED`;
/// otherwise the GL type passes through unchanged
pub fn attribute_type_code(vulkan_def: bool, gl_type: u32) -> TypeCode {
    if !vulkan_def {
        return TypeCode::from(gl_type);
    }

    match gl_to_vk_format(gl_type) {
        Some(format) => TypeCode::from(format.as_raw()),
        None => UNMAPPED,
    }
}
